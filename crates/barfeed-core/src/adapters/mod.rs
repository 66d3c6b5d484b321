mod yahoo;

pub use yahoo::YahooSource;
