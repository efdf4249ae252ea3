// UI 静态资源：从磁盘上的 UI 根目录读取
pub mod disk;

pub use disk::DiskFrontend;
