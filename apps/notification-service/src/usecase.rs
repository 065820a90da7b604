//! # ユースケース層

pub mod notification;
