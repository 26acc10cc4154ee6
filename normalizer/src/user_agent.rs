//! User agent decomposition.
//!
//! Parsing is delegated to a `UserAgentParser` backend. Whatever the backend
//! does (error or panic), the hit only ever sees absent device fields.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use uaparser::{Parser as _, UserAgentParser as UapParser};

use crate::errors::UserAgentError;

/// Family name plus dotted version components
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionedFamily {
    pub family: String,
    pub major: Option<String>,
    pub minor: Option<String>,
    pub patch: Option<String>,
}

impl VersionedFamily {
    /// `major.minor.patch` with missing parts left empty, so a fully unknown
    /// version is `".."`
    pub fn version(&self) -> String {
        format!(
            "{}.{}.{}",
            self.major.as_deref().unwrap_or_default(),
            self.minor.as_deref().unwrap_or_default(),
            self.patch.as_deref().unwrap_or_default()
        )
    }

    fn non_empty_family(&self) -> Option<String> {
        Some(self.family.clone()).filter(|family| !family.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub browser: VersionedFamily,
    pub os: VersionedFamily,
    pub device_brand: Option<String>,
    pub device_model: Option<String>,
}

pub trait UserAgentParser: Send + Sync {
    fn parse(&self, user_agent: &str) -> Result<UserAgentInfo, UserAgentError>;
}

/// Parser backed by the uap-core regex definitions
pub struct UapUserAgentParser {
    inner: UapParser,
}

impl UapUserAgentParser {
    /// Loads a uap-core `regexes.yaml`
    pub fn from_file(path: &Path) -> Result<Self, UserAgentError> {
        let path = path
            .to_str()
            .ok_or_else(|| UserAgentError::LoadError(format!("invalid path: {}", path.display())))?;
        let inner =
            UapParser::from_yaml(path).map_err(|e| UserAgentError::LoadError(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl UserAgentParser for UapUserAgentParser {
    fn parse(&self, user_agent: &str) -> Result<UserAgentInfo, UserAgentError> {
        let client = self.inner.parse(user_agent);

        Ok(UserAgentInfo {
            browser: VersionedFamily {
                family: client.user_agent.family.to_string(),
                major: client.user_agent.major.as_ref().map(|v| v.to_string()),
                minor: client.user_agent.minor.as_ref().map(|v| v.to_string()),
                patch: client.user_agent.patch.as_ref().map(|v| v.to_string()),
            },
            os: VersionedFamily {
                family: client.os.family.to_string(),
                major: client.os.major.as_ref().map(|v| v.to_string()),
                minor: client.os.minor.as_ref().map(|v| v.to_string()),
                patch: client.os.patch.as_ref().map(|v| v.to_string()),
            },
            device_brand: client.device.brand.as_ref().map(|v| v.to_string()),
            device_model: client.device.model.as_ref().map(|v| v.to_string()),
        })
    }
}

/// Used when no regex definitions are configured
pub struct NoopUserAgentParser;

impl UserAgentParser for NoopUserAgentParser {
    fn parse(&self, _user_agent: &str) -> Result<UserAgentInfo, UserAgentError> {
        Err(UserAgentError::Unavailable)
    }
}

/// Runs `parser` in isolation. Any failure, including a missing string,
/// becomes None.
pub fn parse_user_agent(
    parser: &dyn UserAgentParser,
    user_agent: Option<&str>,
) -> Option<UserAgentInfo> {
    let user_agent = user_agent?;

    match catch_unwind(AssertUnwindSafe(|| parser.parse(user_agent))) {
        Ok(Ok(info)) => Some(info),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "User agent not parsed");
            None
        }
        Err(_) => {
            tracing::debug!("User agent parser panicked");
            None
        }
    }
}

/// The device fields derived from a user agent
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserAgentFields {
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub operating_system: Option<String>,
    pub operating_system_version: Option<String>,
    pub mobile_device_model: Option<String>,
    pub mobile_device_branding: Option<String>,
}

impl From<Option<&UserAgentInfo>> for UserAgentFields {
    fn from(info: Option<&UserAgentInfo>) -> Self {
        let Some(info) = info else {
            return UserAgentFields::default();
        };

        UserAgentFields {
            browser: info.browser.non_empty_family(),
            browser_version: Some(info.browser.version()),
            operating_system: info.os.non_empty_family(),
            operating_system_version: Some(info.os.version()),
            mobile_device_model: info.device_model.clone().filter(|m| !m.is_empty()),
            mobile_device_branding: info.device_brand.clone().filter(|b| !b.is_empty()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testutils {
    use super::*;

    /// Recognizes one fixed user agent and rejects everything else
    pub struct FakeUserAgentParser;

    pub const CHROME_ON_ANDROID: &str =
        "Mozilla/5.0 (Linux; Android 11; Pixel 5) Chrome/90.0.4430.91 Mobile";

    impl UserAgentParser for FakeUserAgentParser {
        fn parse(&self, user_agent: &str) -> Result<UserAgentInfo, UserAgentError> {
            if user_agent == CHROME_ON_ANDROID {
                return Ok(UserAgentInfo {
                    browser: VersionedFamily {
                        family: "Chrome Mobile".to_string(),
                        major: Some("90".to_string()),
                        minor: Some("0".to_string()),
                        patch: Some("4430".to_string()),
                    },
                    os: VersionedFamily {
                        family: "Android".to_string(),
                        major: Some("11".to_string()),
                        minor: None,
                        patch: None,
                    },
                    device_brand: Some("Google".to_string()),
                    device_model: Some("Pixel 5".to_string()),
                });
            }
            Err(UserAgentError::Unrecognized)
        }
    }
}
