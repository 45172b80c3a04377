//! One module per subcommand.

pub mod add;
pub mod backup;
pub mod copy;
pub mod delete;
pub mod favorite;
pub mod generate;
pub mod info;
pub mod init;
pub mod list;
pub mod passwd;
pub mod restore;
pub mod show;
