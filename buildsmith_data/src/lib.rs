pub mod augments;
pub mod champions;
pub mod items;
pub mod remote;
pub mod stats;

pub use champions::{Champion, ChampionStats, find_champion, load_champions, stats_at_level};
pub use items::{Item, champion_pool, load_items};
pub use remote::DragonCache;
