pub mod checks;


pub use checks::{
    ComponentHealth, HealthCheck, HealthChecker, HealthStatus, MailerHealthCheck, SystemHealth,
};
