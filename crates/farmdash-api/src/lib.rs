// farmdash-api: async clients for the Moonraker (Klipper) and OctoPrint HTTP APIs

pub mod error;
pub mod moonraker;
pub mod octoprint;
pub mod transport;

pub use error::Error;
pub use moonraker::MoonrakerClient;
pub use octoprint::OctoPrintClient;
pub use transport::{ApiRequest, AuthScheme, HttpTransport, TransportConfig};
