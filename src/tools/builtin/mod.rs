pub mod profile;
pub mod reminder;
pub mod skyblock;

pub use profile::{CheckLinkStatusTool, LinkMinecraftAccountTool};
pub use reminder::CreateReminderTool;
pub use skyblock::GetSkyblockStatsTool;
