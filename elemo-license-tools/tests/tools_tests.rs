use elemo_license::{LicenseError, PrivateKey};
use elemo_license_tools::issue::{issue, IssueArgs};
use elemo_license_tools::keygen::{keygen, KeygenArgs};
use elemo_license_tools::validate::{render, validate, ValidateArgs};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a temp dir holding a fresh key pair.
    fn with_keys() -> Self {
        let ws = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        keygen(&KeygenArgs {
            private_key: ws.private_key(),
            public_key: ws.public_key(),
            force: false,
            verbose: false,
        })
        .unwrap();
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn private_key(&self) -> PathBuf {
        self.path("signing.key")
    }

    fn public_key(&self) -> PathBuf {
        self.path("license.pub")
    }

    fn license(&self) -> PathBuf {
        self.path("license.key")
    }

    fn issue_args(&self) -> IssueArgs {
        IssueArgs {
            email: "ops@example.com".into(),
            organization: "Example Inc".into(),
            validity_period: 30,
            features: None,
            quota: vec!["seats=5".into()],
            private_key: self.private_key(),
            license: self.license(),
            verbose: false,
        }
    }

    fn validate_args(&self) -> ValidateArgs {
        ValidateArgs {
            public_key: self.public_key(),
            license: self.license(),
            verbose: false,
        }
    }
}

fn license_error(err: &anyhow::Error) -> &LicenseError {
    err.downcast_ref::<LicenseError>()
        .unwrap_or_else(|| panic!("expected a LicenseError, got {err:#}"))
}

#[test]
fn issue_then_validate() {
    let ws = Workspace::with_keys();
    let issued = issue(&ws.issue_args()).unwrap();
    let validated = validate(&ws.validate_args()).unwrap();

    assert_eq!(validated, issued);
    assert_eq!(validated.organization(), "Example Inc");
    assert_eq!(validated.quota("seats"), Some(5));
    assert!(validated.within_threshold("seats", 5));
    assert!(!validated.within_threshold("seats", 6));
    assert!(validated.is_valid(chrono::Utc::now()));
    assert!(validated.has_feature("releases"));
}

#[test]
fn quota_overrides_merge_over_defaults() {
    let ws = Workspace::with_keys();
    let mut args = ws.issue_args();
    args.quota = vec!["seats=12,boards=2".into(), "projects=1".into()];
    let license = issue(&args).unwrap();

    assert_eq!(license.quota("seats"), Some(12));
    assert_eq!(license.quota("boards"), Some(2));
    assert_eq!(license.quota("projects"), Some(1));
    assert_eq!(license.quota("organizations"), Some(1));
}

#[test]
fn explicit_empty_features_grant_base_tier() {
    let ws = Workspace::with_keys();
    let mut args = ws.issue_args();
    args.features = Some(String::new());
    let license = issue(&args).unwrap();
    assert!(license.features().is_empty());
}

#[test]
fn empty_organization_writes_nothing() {
    let ws = Workspace::with_keys();
    let mut args = ws.issue_args();
    args.organization = String::new();

    let err = issue(&args).unwrap_err();
    assert_eq!(license_error(&err).invalid_fields(), ["organization"]);
    assert!(!ws.license().exists());
}

#[test]
fn zero_validity_rejected() {
    let ws = Workspace::with_keys();
    let mut args = ws.issue_args();
    args.validity_period = 0;
    assert!(issue(&args).is_err());
    assert!(!ws.license().exists());
}

#[test]
fn validity_past_year_9999_rejected() {
    let ws = Workspace::with_keys();
    let mut args = ws.issue_args();
    args.validity_period = 3_000_000;

    let err = issue(&args).unwrap_err();
    assert_eq!(license_error(&err).invalid_fields(), ["expires_at"]);
    assert!(!ws.license().exists());
}

#[test]
fn validity_overflowing_the_calendar_rejected() {
    let ws = Workspace::with_keys();
    let mut args = ws.issue_args();
    args.validity_period = 200_000_000;

    let err = issue(&args).unwrap_err();
    assert!(format!("{err:#}").contains("out of range"));
    assert!(!ws.license().exists());
}

#[test]
fn bad_quota_rejected() {
    let ws = Workspace::with_keys();
    let mut args = ws.issue_args();
    args.quota = vec!["seats=-3".into()];
    assert!(issue(&args).is_err());
    assert!(!ws.license().exists());
}

#[test]
fn malformed_private_key_rejected() {
    let ws = Workspace::with_keys();
    elemo_license_tools::files::write_secret_file(&ws.private_key(), "not a key").unwrap();
    let err = issue(&ws.issue_args()).unwrap_err();
    assert!(matches!(license_error(&err), LicenseError::MalformedKey(_)));
}

#[test]
fn validate_with_foreign_key_fails_verify() {
    let ws = Workspace::with_keys();
    issue(&ws.issue_args()).unwrap();

    let other = PrivateKey::generate().public_key();
    std::fs::write(ws.public_key(), other.to_text()).unwrap();

    let err = validate(&ws.validate_args()).unwrap_err();
    assert!(matches!(license_error(&err), LicenseError::BadSignature));
    assert!(format!("{err:#}").contains("rejected during verify"));
}

#[test]
fn validate_missing_license_file() {
    let ws = Workspace::with_keys();
    assert!(validate(&ws.validate_args()).is_err());
}

#[test]
fn render_is_indented_json() {
    let ws = Workspace::with_keys();
    issue(&ws.issue_args()).unwrap();
    let rendered = render(&validate(&ws.validate_args()).unwrap()).unwrap();
    assert!(rendered.starts_with("{\n  \"id\": "));
    assert!(rendered.contains("\"organization\": \"Example Inc\""));
}

#[test]
fn keygen_refuses_to_overwrite_without_force() {
    let ws = Workspace::with_keys();
    let before = std::fs::read_to_string(ws.private_key()).unwrap();

    let mut args = KeygenArgs {
        private_key: ws.private_key(),
        public_key: ws.public_key(),
        force: false,
        verbose: false,
    };
    assert!(keygen(&args).is_err());
    assert_eq!(std::fs::read_to_string(ws.private_key()).unwrap(), before);

    args.force = true;
    let public = keygen(&args).unwrap();
    assert_ne!(std::fs::read_to_string(ws.private_key()).unwrap(), before);
    assert_eq!(std::fs::read_to_string(ws.public_key()).unwrap(), public.to_text());
}

#[cfg(unix)]
#[test]
fn written_files_have_expected_modes() {
    use std::os::unix::fs::PermissionsExt;

    let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
    let ws = Workspace::with_keys();
    issue(&ws.issue_args()).unwrap();

    assert_eq!(mode(&ws.private_key()), 0o600);
    assert_eq!(mode(&ws.license()), 0o600);
    assert_eq!(mode(&ws.public_key()), 0o644);
}
