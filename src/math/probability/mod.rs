pub mod seed;

pub use seed::events::SeedChangedEvent;
pub use seed::plugin::SeedPlugin;
pub use seed::resource::SeedResource;
