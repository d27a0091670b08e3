//! User Name Value Object
//!
//! ユーザー名はログインと表示に使う一意なハンドル。
//!
//! ## 不変条件
//! - 前後の空白を除いた後、1〜50文字
//! - 空白・制御文字を含まない
//! - 大文字小文字は区別する（入力どおり保存・照合）

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 50;

/// Validated user name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    pub fn new(input: impl AsRef<str>) -> AuthResult<Self> {
        let name = input.as_ref().trim();

        if name.is_empty() {
            return Err(AuthError::Validation("Username is required".into()));
        }

        let length = name.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(AuthError::Validation(format!(
                "Username must be at most {USER_NAME_MAX_LENGTH} characters"
            )));
        }

        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AuthError::Validation(
                "Username cannot contain whitespace".into(),
            ));
        }

        Ok(Self(name.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = AuthError;

    fn try_from(value: String) -> AuthResult<Self> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
