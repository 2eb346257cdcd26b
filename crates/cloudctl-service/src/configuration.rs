//! Service configuration: per-role instance counts, configuration settings
//! and certificate thumbprints. A project carries one configuration for the
//! cloud and one for the local emulator.

use serde::{Deserialize, Serialize};

/// Root of `ServiceConfiguration.{Cloud,Local}.cscfg.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfiguration {
    pub service_name: String,
    #[serde(default)]
    pub roles: Vec<RoleSettings>,
}

impl ServiceConfiguration {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            roles: Vec::new(),
        }
    }

    pub fn role(&self, name: &str) -> Option<&RoleSettings> {
        self.roles.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

/// Settings of one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSettings {
    pub name: String,
    pub instances: u32,
    #[serde(default)]
    pub configuration_settings: Vec<ConfigurationSetting>,
    #[serde(default)]
    pub certificates: Vec<CertificateThumbprint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationSetting {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateThumbprint {
    pub name: String,
    pub thumbprint: String,
    pub thumbprint_algorithm: String,
}

impl RoleSettings {
    pub fn new(name: impl Into<String>, instances: u32) -> Self {
        Self {
            name: name.into(),
            instances,
            configuration_settings: Vec::new(),
            certificates: Vec::new(),
        }
    }

    pub fn setting(&self, name: &str) -> Option<&str> {
        self.configuration_settings
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.value.as_str())
    }

    /// Set `name` to `value`, leaving exactly one entry for `name`.
    pub fn set_setting(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.configuration_settings.iter().position(|s| s.name == name) {
            Some(first) => {
                self.configuration_settings[first].value = value;
                let mut seen = false;
                self.configuration_settings.retain(|s| {
                    if s.name != name {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.configuration_settings.push(ConfigurationSetting {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn remove_setting(&mut self, name: &str) {
        self.configuration_settings.retain(|s| s.name != name);
    }

    /// Insert or replace the thumbprint entry with the same name.
    pub fn set_certificate(&mut self, certificate: CertificateThumbprint) {
        self.certificates.retain(|c| c.name != certificate.name);
        self.certificates.push(certificate);
    }

    pub fn certificate(&self, name: &str) -> Option<&CertificateThumbprint> {
        self.certificates.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_setting_adds_then_updates() {
        let mut role = RoleSettings::new("WebRole", 1);
        role.set_setting("Enabled", "true");
        role.set_setting("Enabled", "false");
        assert_eq!(role.configuration_settings.len(), 1);
        assert_eq!(role.setting("Enabled"), Some("false"));
    }

    #[test]
    fn test_set_setting_collapses_duplicates() {
        let mut role = RoleSettings::new("WebRole", 1);
        for value in ["a", "b", "c"] {
            role.configuration_settings.push(ConfigurationSetting {
                name: "Key".to_string(),
                value: value.to_string(),
            });
        }
        role.configuration_settings.push(ConfigurationSetting {
            name: "Other".to_string(),
            value: "x".to_string(),
        });

        role.set_setting("Key", "z");

        let keys: Vec<_> = role
            .configuration_settings
            .iter()
            .filter(|s| s.name == "Key")
            .collect();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].value, "z");
        assert_eq!(role.setting("Other"), Some("x"));
    }

    #[test]
    fn test_set_certificate_replaces() {
        let mut role = RoleSettings::new("WorkerRole", 2);
        let cert = CertificateThumbprint {
            name: "C".to_string(),
            thumbprint: "AA".to_string(),
            thumbprint_algorithm: "sha1".to_string(),
        };
        role.set_certificate(cert.clone());
        role.set_certificate(CertificateThumbprint {
            thumbprint: "BB".to_string(),
            ..cert
        });
        assert_eq!(role.certificates.len(), 1);
        assert_eq!(role.certificate("C").unwrap().thumbprint, "BB");
    }
}
