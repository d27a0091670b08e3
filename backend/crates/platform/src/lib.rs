//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (CSPRNG bytes, SHA-256, hex)
//! - Password hashing (Argon2id)
//! - SMTP mail delivery

pub mod crypto;
pub mod mail;
pub mod password;
