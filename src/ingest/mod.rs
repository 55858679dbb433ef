pub mod columns;
pub mod dates;
pub mod extract;
pub mod forecast;
