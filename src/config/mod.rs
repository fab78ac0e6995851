// ==========================================
// 质检报告系统 - 配置层
// ==========================================
// 职责: 系统配置管理（满班时数、状态轮询间隔、默认语言）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

pub use config_manager::{config_keys, ConfigManager};
