pub mod types;
pub mod sources {
    pub mod coingecko;
}
pub mod normalizers;

pub use normalizers::closes;
pub use sources::coingecko::CoinGeckoClient;
pub use types::*;
