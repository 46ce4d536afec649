//! Resource kind families
//!
//! Kinds are matched as written in the installation descriptor, so every
//! kubectl spelling (short name, singular, plural) is listed.

use std::fmt;

/// Kinds whose instances are backed by pods
const POD_KINDS: &[&str] = &[
    "po",
    "pod",
    "pods",
    "deploy",
    "deployment",
    "deployments",
    "job",
    "jobs",
    "sts",
    "statefulset",
    "statefulsets",
    "ds",
    "daemonset",
    "daemonsets",
];

const SERVICE_KINDS: &[&str] = &["svc", "service", "services"];

const JOB_KINDS: &[&str] = &["job", "jobs"];

/// Kind of a persistent volume claim component
pub const PVC_KIND: &str = "pvc";

/// Flags if the kind is a pod or is backed by pods
pub fn is_pod(kind: &str) -> bool {
    POD_KINDS.contains(&kind)
}

/// Flags if the kind is a service
pub fn is_service(kind: &str) -> bool {
    SERVICE_KINDS.contains(&kind)
}

/// Flags if the kind is a job
pub fn is_job(kind: &str) -> bool {
    JOB_KINDS.contains(&kind)
}

/// Flags if the kind is a persistent volume claim
pub fn is_pvc(kind: &str) -> bool {
    kind == PVC_KIND
}

/// Category used to narrow alias resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Any kind matches
    Any,
    /// Pods, deployments, jobs, statefulsets, daemonsets
    Pod,
    /// Services
    Service,
    /// Jobs
    Job,
}

impl Category {
    /// Check whether a kind belongs to this category
    pub fn contains(&self, kind: &str) -> bool {
        match self {
            Category::Any => true,
            Category::Pod => is_pod(kind),
            Category::Service => is_service(kind),
            Category::Job => is_job(kind),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Any => "any",
            Category::Pod => "pod",
            Category::Service => "service",
            Category::Job => "job",
        };
        f.write_str(name)
    }
}
