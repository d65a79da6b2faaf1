pub static PREFIX: &str = env!("PREFIX");
pub static LIBRARY: &str = env!("LIBRARY");
pub static SYSCONFDIR: &str = env!("SYSCONFDIR");
pub static TEMPDIR: &str = env!("TEMPDIR");
