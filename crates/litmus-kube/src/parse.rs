//! Parsing of kubectl jsonpath output
//!
//! All functions here are pure: they take text already returned by a runner
//! and turn it into typed facts. Output is expected in one of two shapes:
//!
//! - space separated lists, e.g. `{.items[*].spec.nodeName}`
//!   ```text
//!   node-a node-b node-c
//!   ```
//! - records produced by a `range` template, one record per pod:
//!   ```text
//!   $ JSONPATH='{range .items[*]}{@.metadata.name}::{@.status.containerStatuses[*].ready}::::{end}'
//!   $ kubectl get po -n kube-system --sort-by=.metadata.creationTimestamp -o jsonpath="$JSONPATH"
//!   kube-addon-manager::true::::kube-dns-54cccfbdf8-q7v2c::false false true::::storage-provisioner::true::::
//!   ```

use crate::error::{Result, VerifyError};

/// Separates pod records in [`POD_READINESS_TEMPLATE`] output
pub const RECORD_DELIMITER: &str = "::::";

/// Separates the pod name from its readiness flags within a record
pub const FIELD_DELIMITER: &str = "::";

/// jsonpath template emitting one `name::flags::::` record per pod
pub const POD_READINESS_TEMPLATE: &str = "jsonpath={range .items[*]}{@.metadata.name}::{@.status.containerStatuses[*].ready}::::{end}";

const READY: &str = "true";
const NOT_READY: &str = "false";
const SUCCEEDED: &str = "succeeded";

/// Readiness derived from a set of container flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// No container reported `false` and at least one reported `true`
    Ready,
    /// At least one container reported `false`
    NotReady,
    /// Neither flag was present
    Unknown,
}

/// A pod record from [`POD_READINESS_TEMPLATE`] output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRecord {
    pub name: String,
    pub readiness: Vec<String>,
}

impl PodRecord {
    pub fn status(&self) -> Readiness {
        readiness(&self.readiness)
    }
}

/// Strip whitespace and one pair of surrounding single quotes
///
/// kubectl echoes a quoted jsonpath template literally, so `'{.x}'` yields
/// `'value'`.
pub fn normalize(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Split space separated output into tokens, dropping empty ones
pub fn split_tokens(raw: &str) -> Vec<String> {
    normalize(raw)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Evaluate a set of readiness flags
///
/// A single `false` anywhere makes the whole set not ready, whatever the
/// other flags say.
pub fn readiness<S: AsRef<str>>(tokens: &[S]) -> Readiness {
    let mut seen_ready = false;
    for token in tokens {
        match token.as_ref().trim() {
            NOT_READY => return Readiness::NotReady,
            READY => seen_ready = true,
            _ => {}
        }
    }

    if seen_ready {
        Readiness::Ready
    } else {
        Readiness::Unknown
    }
}

/// Decide whether `subject` is running from raw readiness output
///
/// Not-ready and unknown readiness are both errors here; the readiness flags
/// are attached for diagnosis.
pub fn require_running(subject: &str, raw: &str) -> Result<bool> {
    let tokens = split_tokens(raw);
    match readiness(&tokens) {
        Readiness::Ready => Ok(true),
        Readiness::NotReady => Err(VerifyError::NotRunning {
            subject: subject.to_string(),
            readiness: tokens,
        }),
        Readiness::Unknown => Err(VerifyError::StatusIndeterminate {
            subject: subject.to_string(),
            output: tokens,
        }),
    }
}

/// Parse records in server order
///
/// Records are consumed left to right as `name::flags::::`. A pod without
/// container statuses renders as `name::::::`, so the flags field is taken up
/// to the next record delimiter rather than split out of a pre-cut record.
/// Records without a name are skipped.
pub fn pod_records(raw: &str) -> Vec<PodRecord> {
    let mut records = Vec::new();
    let mut rest = normalize(raw);

    while !rest.trim().is_empty() {
        let (name, after_name) = rest.split_once(FIELD_DELIMITER).unwrap_or((rest, ""));
        let (flags, next) = after_name
            .split_once(RECORD_DELIMITER)
            .unwrap_or((after_name, ""));
        rest = next;

        let name = name.trim();
        if name.is_empty() {
            tracing::warn!(flags, "skipping pod record without a name");
            continue;
        }

        records.push(PodRecord {
            name: name.to_string(),
            readiness: split_tokens(flags),
        });
    }

    records
}

/// Names of all ready pods, in server order
pub fn running_pods(raw: &str) -> Vec<String> {
    pod_records(raw)
        .into_iter()
        .filter(|p| p.status() == Readiness::Ready)
        .map(|p| p.name)
        .collect()
}

/// First ready pod in server order
///
/// With output sorted by creation timestamp this is the oldest running pod.
/// Pods listed before it are passed over whatever their own state.
pub fn oldest_running_pod(raw: &str) -> Option<String> {
    pod_records(raw)
        .into_iter()
        .find(|p| p.status() == Readiness::Ready)
        .map(|p| p.name)
}

/// Check that every pod phase is `Succeeded`
pub fn require_all_succeeded(raw: &str) -> Result<bool> {
    let phases: Vec<String> = split_tokens(raw)
        .into_iter()
        .map(|p| p.to_lowercase())
        .collect();

    if phases.is_empty() {
        return Err(VerifyError::StatusIndeterminate {
            subject: "job pods".to_string(),
            output: phases,
        });
    }

    if phases.iter().any(|p| p != SUCCEEDED) {
        return Err(VerifyError::JobNotCompleted { phases });
    }

    Ok(true)
}

/// Bound volume name, if any
pub fn bound_volume(raw: &str) -> Option<String> {
    let volume = normalize(raw);
    (!volume.is_empty()).then(|| volume.to_string())
}

/// Index of the first value that appeared earlier in the list
pub fn first_duplicate<S: AsRef<str>>(values: &[S]) -> Option<usize> {
    let mut seen = std::collections::HashSet::new();
    values.iter().position(|v| !seen.insert(v.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  node-a node-b \n"), "node-a node-b");
        assert_eq!(normalize("'true false'"), "true false");
        assert_eq!(normalize("''"), "");
        assert_eq!(normalize("'"), "'");
    }

    #[test]
    fn test_split_tokens_drops_empty() {
        assert_eq!(split_tokens(" a  b\tc \n"), vec!["a", "b", "c"]);
        assert!(split_tokens("   ").is_empty());
    }

    #[test]
    fn test_any_false_is_not_ready() {
        for flags in [
            vec!["false"],
            vec!["true", "false"],
            vec!["false", "true", "true"],
            vec!["true", "true", "true", "false"],
        ] {
            assert_eq!(readiness(&flags), Readiness::NotReady, "{:?}", flags);
        }
    }

    #[test]
    fn test_only_true_is_ready() {
        assert_eq!(readiness(&["true"]), Readiness::Ready);
        assert_eq!(readiness(&["true", "true", "true"]), Readiness::Ready);
    }

    #[test]
    fn test_missing_flags_is_unknown() {
        let empty: [&str; 0] = [];
        assert_eq!(readiness(&empty), Readiness::Unknown);
        assert_eq!(readiness(&["CrashLoopBackOff"]), Readiness::Unknown);
        assert_eq!(readiness(&["True"]), Readiness::Unknown);
    }

    #[test]
    fn test_require_running() {
        assert!(require_running("pod 'a'", "true true").unwrap());

        let err = require_running("pod 'a'", "true false true").unwrap_err();
        match err {
            VerifyError::NotRunning { readiness, .. } => {
                assert_eq!(readiness, vec!["true", "false", "true"])
            }
            other => panic!("expected not running, got {:?}", other),
        }

        assert!(matches!(
            require_running("pod 'a'", ""),
            Err(VerifyError::StatusIndeterminate { .. })
        ));
    }

    #[test]
    fn test_oldest_running_skips_earlier_pods() {
        assert_eq!(
            oldest_running_pod("A::false::::B::true::::"),
            Some("B".to_string())
        );
        assert_eq!(
            oldest_running_pod("A::::::B::true true::::C::true::::"),
            Some("B".to_string())
        );
        assert_eq!(oldest_running_pod("A::false::::B::true false::::"), None);
        assert_eq!(oldest_running_pod(""), None);
    }

    #[test]
    fn test_running_pods_keeps_order() {
        let raw = "kube-addon-manager::true::::kube-dns-54cccfbdf8-q7v2c::false false true::::\
                   kubernetes-dashboard::false::::storage-provisioner::true::::tiller-deploy::true::::";
        assert_eq!(
            running_pods(raw),
            vec!["kube-addon-manager", "storage-provisioner", "tiller-deploy"]
        );
    }

    #[test]
    fn test_pod_without_container_statuses_keeps_next_record() {
        let raw = "pending-0::::::running-1::true::::running-2::true::::";

        assert_eq!(oldest_running_pod(raw), Some("running-1".to_string()));
        assert_eq!(running_pods(raw), vec!["running-1", "running-2"]);

        let records = pod_records(raw);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "pending-0");
        assert_eq!(records[0].status(), Readiness::Unknown);
    }

    #[test]
    fn test_pending_pod_as_last_record() {
        let raw = "'running-0::false::::pending-1::::::'";
        assert_eq!(
            pod_records(raw),
            vec![
                PodRecord {
                    name: "running-0".to_string(),
                    readiness: vec!["false".to_string()],
                },
                PodRecord {
                    name: "pending-1".to_string(),
                    readiness: vec![],
                },
            ]
        );
        assert_eq!(oldest_running_pod(raw), None);
    }

    #[test]
    fn test_pod_records_skip_nameless_entries() {
        let records = pod_records("::true::::ok::true::::");
        assert_eq!(
            records,
            vec![PodRecord {
                name: "ok".to_string(),
                readiness: vec!["true".to_string()],
            }]
        );
        assert!(pod_records("").is_empty());
        assert!(pod_records("  ").is_empty());
    }

    #[test]
    fn test_job_phases() {
        assert!(require_all_succeeded("Succeeded succeeded SUCCEEDED").unwrap());

        match require_all_succeeded("Succeeded Running") {
            Err(VerifyError::JobNotCompleted { phases }) => {
                assert_eq!(phases, vec!["succeeded", "running"])
            }
            other => panic!("expected job not completed, got {:?}", other),
        }

        assert!(matches!(
            require_all_succeeded(""),
            Err(VerifyError::StatusIndeterminate { .. })
        ));
    }

    #[test]
    fn test_bound_volume() {
        assert_eq!(
            bound_volume("pvc-1f2e3d4c\n"),
            Some("pvc-1f2e3d4c".to_string())
        );
        assert_eq!(bound_volume("  "), None);
        assert_eq!(bound_volume("''"), None);
    }

    #[test]
    fn test_first_duplicate() {
        assert_eq!(first_duplicate(&["n1", "n2", "n3"]), None);
        assert_eq!(first_duplicate(&["n1", "n2", "n1"]), Some(2));
        let empty: [&str; 0] = [];
        assert_eq!(first_duplicate(&empty), None);
    }
}
