pub mod links;
pub mod socials;

pub use links::extract_links;
pub use socials::{network_for_host, pick_socials, socials_from_page};
