// Business domains
pub mod option_sets;
