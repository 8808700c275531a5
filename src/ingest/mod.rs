/// Upstream data ingestion.
///
/// Submodules:
/// - `nws` — api.weather.gov observation client (latest + recent window).

pub mod nws;
