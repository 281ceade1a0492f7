pub mod app;
pub mod builder;
pub mod handler;

pub use app::HealthServer;
pub use builder::ServerBuilder;
pub use handler::HealthEndpoint;
