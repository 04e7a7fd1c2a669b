//! Scripted stand-ins for `kubectl` and `kubeseal`.
//!
//! [`FakeCluster`] answers the exact invocations the rotation code makes
//! and keeps an in-memory store of sealed secrets. "Encryption" is a tag:
//! a sealed value reads `sealed-by:<key id>:<plaintext>`, and unsealing
//! succeeds only when the tagged key id is present in the private key file
//! handed to `kubeseal --recovery-unseal`.

use async_trait::async_trait;
use reseal_services::kubectl::SEALING_KEY_LABEL;
use reseal_services::ClusterTools;
use reseal_types::config::RotatorSettings;
use reseal_types::{ProcessExecutor, ProcessOutput, Reporter, Result};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const KEY_NAME_PREFIX: &str = "sealed-secrets-key";

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

#[derive(Default)]
struct State {
    secrets: Vec<(String, String, String)>,
    key_ids: Vec<String>,
    current_key: String,
    raw_cert: Option<String>,
    inventory_error: Option<String>,
    cert_error: Option<String>,
    get_errors: HashSet<String>,
    apply_errors: HashSet<String>,
    renamed_reseal: Option<String>,
    calls: Vec<Call>,
}

/// In-memory cluster driven through the process seam.
#[derive(Clone)]
pub struct FakeCluster {
    state: Arc<Mutex<State>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        let state = State {
            key_ids: vec!["k1".to_string()],
            current_key: "k1".to_string(),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn with_state(self, f: impl FnOnce(&mut State)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_secret(self, name: &str, namespace: &str, manifest: String) -> Self {
        self.with_state(|s| s.secrets.push((name.to_string(), namespace.to_string(), manifest)))
    }

    /// Private key history and the id of the key behind the certificate.
    pub fn with_keys(self, ids: &[&str], current: &str) -> Self {
        self.with_state(|s| {
            s.key_ids = ids.iter().map(|id| id.to_string()).collect();
            s.current_key = current.to_string();
        })
    }

    /// Serve `cert` verbatim from `--fetch-cert`.
    pub fn with_raw_cert(self, cert: &str) -> Self {
        self.with_state(|s| s.raw_cert = Some(cert.to_string()))
    }

    pub fn failing_inventory(self, stderr: &str) -> Self {
        self.with_state(|s| s.inventory_error = Some(stderr.to_string()))
    }

    pub fn failing_cert(self, stderr: &str) -> Self {
        self.with_state(|s| s.cert_error = Some(stderr.to_string()))
    }

    /// Make the per-item fetch of `namespace/name` report NotFound.
    pub fn failing_get(self, name: &str, namespace: &str) -> Self {
        self.with_state(|s| {
            s.get_errors.insert(format!("{}/{}", namespace, name));
        })
    }

    /// Make `kubectl apply` reject `namespace/name`.
    pub fn failing_apply(self, name: &str, namespace: &str) -> Self {
        self.with_state(|s| {
            s.apply_errors.insert(format!("{}/{}", namespace, name));
        })
    }

    /// Make resealing emit a manifest named `name` instead of the input's.
    pub fn renaming_reseal(self, name: &str) -> Self {
        self.with_state(|s| s.renamed_reseal = Some(name.to_string()))
    }

    pub fn tools(&self) -> ClusterTools {
        ClusterTools::from_settings(&RotatorSettings::default(), Arc::new(self.clone()))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of invocations carrying `arg` anywhere in their arguments.
    pub fn count(&self, arg: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.args.iter().any(|a| a == arg))
            .count()
    }

    pub fn manifest(&self, name: &str, namespace: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .iter()
            .find(|(n, ns, _)| n == name && ns == namespace)
            .map(|(_, _, manifest)| manifest.clone())
    }

    /// Key id the stored copy of `namespace/name` is sealed with.
    pub fn sealed_with(&self, name: &str, namespace: &str) -> Option<String> {
        let manifest = self.manifest(name, namespace)?;
        let doc: serde_yaml::Value = serde_yaml::from_str(&manifest).ok()?;
        let value = doc["spec"]["encryptedData"]["password"].as_str()?;
        value.split(':').nth(1).map(str::to_string)
    }

    fn kubectl(&self, args: &[String], stdin: Option<&str>) -> ProcessOutput {
        let args: Vec<&str> = match args {
            [flag, _, rest @ ..] if flag == "--context" => rest.iter().map(String::as_str).collect(),
            _ => args.iter().map(String::as_str).collect(),
        };
        let mut state = self.state.lock().unwrap();

        match args.as_slice() {
            ["get", _, "--all-namespaces", "-o", "json"] => {
                if let Some(stderr) = &state.inventory_error {
                    return ProcessOutput::failed(1, stderr.clone());
                }
                let items: Vec<_> = state
                    .secrets
                    .iter()
                    .map(|(name, ns, _)| json!({"metadata": {"name": name, "namespace": ns}}))
                    .collect();
                ProcessOutput::ok(json!({"apiVersion": "v1", "kind": "List", "items": items}).to_string())
            }
            ["get", "secret", "-n", ns, "-l", label, "-o", "yaml"] if *label == SEALING_KEY_LABEL => {
                let items: Vec<_> = state
                    .key_ids
                    .iter()
                    .map(|id| {
                        json!({
                            "apiVersion": "v1",
                            "kind": "Secret",
                            "metadata": {
                                "name": format!("{}{}", KEY_NAME_PREFIX, id),
                                "namespace": ns,
                                "labels": {SEALING_KEY_LABEL: "active"},
                            },
                            "data": {"tls.key": format!("PRIVATE-{}", id)},
                        })
                    })
                    .collect();
                let list = json!({"apiVersion": "v1", "kind": "List", "items": items});
                ProcessOutput::ok(serde_yaml::to_string(&list).unwrap())
            }
            ["get", _, name, "-n", ns, "-o", "json"] => {
                let key = format!("{}/{}", ns, name);
                let found = state
                    .secrets
                    .iter()
                    .find(|(n, namespace, _)| n == name && namespace == ns);
                match found {
                    Some((_, _, manifest)) if !state.get_errors.contains(&key) => ProcessOutput::ok(manifest.clone()),
                    _ => ProcessOutput::failed(
                        1,
                        format!("Error from server (NotFound): sealedsecrets.bitnami.com \"{}\" not found", name),
                    ),
                }
            }
            ["apply", "-f", "-"] => {
                let manifest = stdin.unwrap_or_default().to_string();
                let doc: serde_yaml::Value = match serde_yaml::from_str(&manifest) {
                    Ok(doc) => doc,
                    Err(e) => return ProcessOutput::failed(1, format!("error: {}", e)),
                };
                let name = doc["metadata"]["name"].as_str().unwrap_or_default().to_string();
                let ns = doc["metadata"]["namespace"].as_str().unwrap_or_default().to_string();

                if state.apply_errors.contains(&format!("{}/{}", ns, name)) {
                    return ProcessOutput::failed(
                        1,
                        "Error from server (Forbidden): admission webhook denied the request",
                    );
                }
                let existing = state
                    .secrets
                    .iter()
                    .position(|(n, namespace, _)| *n == name && *namespace == ns);
                match existing {
                    Some(index) => state.secrets[index].2 = manifest,
                    None => state.secrets.push((name.clone(), ns, manifest)),
                }
                ProcessOutput::ok(format!("sealedsecret.bitnami.com/{} configured\n", name))
            }
            ["version", "--client"] => ProcessOutput::ok("Client Version: v1.30.2\n"),
            other => ProcessOutput::failed(2, format!("unexpected kubectl invocation: {:?}", other)),
        }
    }

    fn kubeseal(&self, args: &[String], stdin: Option<&str>) -> ProcessOutput {
        let state = self.state.lock().unwrap();

        match args.first().map(String::as_str) {
            Some("--fetch-cert") => {
                if let Some(stderr) = &state.cert_error {
                    return ProcessOutput::failed(1, stderr.clone());
                }
                let cert = state.raw_cert.clone().unwrap_or_else(|| {
                    format!(
                        "-----BEGIN CERTIFICATE-----\nkey:{}\n-----END CERTIFICATE-----\n",
                        state.current_key
                    )
                });
                ProcessOutput::ok(cert)
            }
            Some("--recovery-unseal") => {
                let Some(path) = args.get(2) else {
                    return ProcessOutput::failed(2, "error: missing --recovery-private-key");
                };
                let keys = match std::fs::read_to_string(path) {
                    Ok(keys) => keys,
                    Err(e) => return ProcessOutput::failed(1, format!("error: {}", e)),
                };
                unseal(&keys, stdin.unwrap_or_default())
            }
            Some("--format=yaml") => {
                let cert_path = args.iter().find_map(|a| a.strip_prefix("--cert="));
                let cert = match cert_path.map(std::fs::read_to_string) {
                    Some(Ok(cert)) => cert,
                    _ => return ProcessOutput::failed(1, "error: cannot read certificate"),
                };
                reseal(&cert, stdin.unwrap_or_default(), state.renamed_reseal.as_deref())
            }
            Some("--version") => ProcessOutput::ok("kubeseal version: 0.26.0\n"),
            _ => ProcessOutput::failed(2, format!("unexpected kubeseal invocation: {:?}", args)),
        }
    }
}

fn unseal(keys: &str, sealed: &str) -> ProcessOutput {
    let keys: serde_yaml::Value = serde_yaml::from_str(keys).unwrap();
    let known: Vec<String> = keys["items"]
        .as_sequence()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["metadata"]["name"].as_str())
                .filter_map(|name| name.strip_prefix(KEY_NAME_PREFIX))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let doc: serde_yaml::Value = match serde_yaml::from_str(sealed) {
        Ok(doc) => doc,
        Err(e) => return ProcessOutput::failed(1, format!("error: {}", e)),
    };

    let mut data = serde_json::Map::new();
    if let Some(encrypted) = doc["spec"]["encryptedData"].as_mapping() {
        for (field, value) in encrypted {
            let field = field.as_str().unwrap_or_default();
            let mut parts = value.as_str().unwrap_or_default().splitn(3, ':');
            let (tag, id, plain) = (parts.next(), parts.next(), parts.next());
            match (tag, id, plain) {
                (Some("sealed-by"), Some(id), Some(plain)) if known.iter().any(|k| k == id) => {
                    data.insert(field.to_string(), json!(plain));
                }
                _ => {
                    return ProcessOutput::failed(
                        1,
                        format!("error: no key could decrypt secret ({})", field),
                    )
                }
            }
        }
    }

    let secret = json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": doc["metadata"]["name"].as_str(),
            "namespace": doc["metadata"]["namespace"].as_str(),
        },
        "data": data,
    });
    ProcessOutput::ok(secret.to_string())
}

fn reseal(cert: &str, plaintext: &str, rename: Option<&str>) -> ProcessOutput {
    let Some(id) = cert.lines().find_map(|line| line.strip_prefix("key:")) else {
        return ProcessOutput::failed(1, "error: invalid certificate");
    };
    let doc: serde_yaml::Value = match serde_yaml::from_str(plaintext) {
        Ok(doc) => doc,
        Err(e) => return ProcessOutput::failed(1, format!("error: {}", e)),
    };

    let mut encrypted = serde_json::Map::new();
    if let Some(data) = doc["data"].as_mapping() {
        for (field, value) in data {
            encrypted.insert(
                field.as_str().unwrap_or_default().to_string(),
                json!(format!("sealed-by:{}:{}", id, value.as_str().unwrap_or_default())),
            );
        }
    }

    let name = rename.or(doc["metadata"]["name"].as_str());
    let namespace = doc["metadata"]["namespace"].as_str();
    let sealed = json!({
        "apiVersion": "bitnami.com/v1alpha1",
        "kind": "SealedSecret",
        "metadata": {"name": name, "namespace": namespace},
        "spec": {
            "encryptedData": encrypted,
            "template": {"metadata": {"name": name, "namespace": namespace}},
        },
    });
    ProcessOutput::ok(serde_yaml::to_string(&sealed).unwrap())
}

#[async_trait]
impl ProcessExecutor for FakeCluster {
    async fn run(&self, program: &str, args: &[String], stdin: Option<&[u8]>) -> Result<ProcessOutput> {
        let stdin = stdin.map(|b| String::from_utf8_lossy(b).to_string());
        let output = match program {
            "kubectl" => self.kubectl(args, stdin.as_deref()),
            "kubeseal" => self.kubeseal(args, stdin.as_deref()),
            other => ProcessOutput::failed(127, format!("{}: command not found", other)),
        };

        self.state.lock().unwrap().calls.push(Call {
            program: program.to_string(),
            args: args.to_vec(),
            stdin,
        });
        Ok(output)
    }
}

/// A sealed secret manifest, as `kubectl get -o json` returns it, with a
/// single `password` field sealed under `key_id`.
pub fn sealed_manifest(name: &str, namespace: &str, key_id: &str, plaintext: &str) -> String {
    json!({
        "apiVersion": "bitnami.com/v1alpha1",
        "kind": "SealedSecret",
        "metadata": {"name": name, "namespace": namespace},
        "spec": {
            "encryptedData": {"password": format!("sealed-by:{}:{}", key_id, plaintext)},
            "template": {"metadata": {"name": name, "namespace": namespace}},
        },
    })
    .to_string()
}

/// Reporter that keeps every message, tagged with its kind.
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    pub fn of_kind(&self, kind: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, kind: &'static str, message: &str) {
        self.messages.lock().unwrap().push((kind, message.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn section(&self, title: &str) {
        self.push("section", title);
    }

    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn success(&self, message: &str) {
        self.push("success", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }
}
