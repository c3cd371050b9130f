// Edge server module
// Local stand-in for the content-delivery layer: accepts connections, routes
// each request to the edge handler and stops on SIGINT/SIGTERM

pub mod connection;
pub mod listener;
pub mod run;
pub mod signal;

pub use listener::create_reusable_listener;
pub use run::serve;
