pub mod config;
pub mod content;
pub mod html;
pub mod markdown;
pub mod pagemap;
pub mod scanner;
pub mod sidebar;
pub mod site;
pub mod template;

// Re-export main types
pub use config::{Config, SiteConfig};
pub use content::ContentNode;
pub use pagemap::{PageMap, PageMapEntry};
pub use scanner::SiteScanner;
pub use site::{Site, SiteBuilder, SiteError};
pub use template::{TemplateError, TemplateRenderer};
