pub mod home_data;

pub use home_data::{HomeContent, TrendingCache, TrendingUpdate};
