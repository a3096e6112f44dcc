//! Pure HTML-to-record extraction for the classroom portal.
//!
//! Every parser in this crate is a side-effect-free function over an HTML
//! string and a compiled [`PortalSelectors`] bundle. Parsers never return
//! errors: a missing table, tab, cell, or regex match is an absent/empty
//! value, because the portal legitimately omits sections per course.

mod courses;
mod groups;
mod materials;
mod numeric;
mod scores;
mod selectors;
mod tabs;
mod text;

pub use courses::parse_courses;
pub use groups::parse_groups;
pub use materials::parse_files;
pub use numeric::parse_num;
pub use scores::parse_scores;
pub use selectors::PortalSelectors;
pub use tabs::{CourseTab, extract_course_urls};
