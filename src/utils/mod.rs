pub mod rolling_average;
