use taskboard_core::rest::{
  RemoteSettings,
  RestTable
};

/// Builds the hosted table client from
/// the `TASKBOARD_URL` and
/// `TASKBOARD_KEY` values baked in at
/// compile time.
pub fn remote_table()
-> Result<RestTable, String> {
  let settings = RemoteSettings::new(
    option_env!("TASKBOARD_URL")
      .unwrap_or_default(),
    option_env!("TASKBOARD_KEY")
      .unwrap_or_default()
  );

  RestTable::new(&settings).map_err(
    |err| {
      tracing::error!(error = %err, "remote table unavailable");
      format!("{err:#}")
    }
  )
}
