pub mod env;
pub mod master;

pub use env::EnvironmentPort;
pub use master::MasterApi;
