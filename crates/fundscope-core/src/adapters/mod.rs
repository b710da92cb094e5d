mod alphavantage;

pub use alphavantage::AlphaVantageClient;
