/// Middleware modules for the API server
///
/// - `session`: Signed cookie session, exposed to handlers as `Session`

pub mod session;
