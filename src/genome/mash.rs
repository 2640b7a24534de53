//! Mash sketching and pairwise distance invocation.
//!
//! All subprocess mechanics live here, behind [`DistanceProvider`], so the
//! genomic resolver never touches process spawning. One `mash dist` run is
//! scoped to a single query isolate against the full reference sketch, and
//! stdout is consumed line by line; no all-pairs matrix is ever buffered.

use crate::error::{PriorkinError, Result};
use crate::resolve::{DistanceHit, DistanceProvider};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const MASH: &str = "mash";

/// Verify the mash binary is installed and runnable.
pub fn check_mash() -> Result<()> {
    let output = Command::new(MASH)
        .arg("--version")
        .output()
        .map_err(|_| PriorkinError::ToolMissing(MASH.to_string()))?;
    if !output.status.success() {
        return Err(PriorkinError::ToolMissing(MASH.to_string()));
    }
    let version = String::from_utf8_lossy(&output.stdout);
    log::debug!("mash is installed: {}", version.trim());
    Ok(())
}

/// Sketch the reference FASTA with `mash sketch -i`, one sketch entry per
/// sequence. Returns the sketch path.
///
/// A sketch left by a previous run is reused only when `reuse` is set;
/// otherwise its presence is an error so stale sketches cannot leak into a
/// fresh run.
pub fn sketch_reference(
    fasta: &Path,
    output_dir: &Path,
    threads: usize,
    reuse: bool,
) -> Result<PathBuf> {
    let name = fasta
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let sketch = output_dir.join(format!("{name}.msh"));

    if sketch.exists() {
        if reuse {
            log::warn!("using previously created sketch: {}", sketch.display());
            return Ok(sketch);
        }
        return Err(PriorkinError::ToolFailed {
            command: format!("{MASH} sketch"),
            detail: format!(
                "{} already exists and sketch reuse is disabled",
                sketch.display()
            ),
        });
    }

    log::info!("sketching {} to {}", fasta.display(), sketch.display());
    let output = Command::new(MASH)
        .arg("sketch")
        .args(["-p", &threads.to_string()])
        .arg("-i")
        .arg(fasta)
        .arg("-o")
        .arg(&sketch)
        .output()
        .map_err(|_| PriorkinError::ToolMissing(MASH.to_string()))?;

    if !output.status.success() {
        return Err(PriorkinError::ToolFailed {
            command: format!("{MASH} sketch -i {}", fasta.display()),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(sketch)
}

/// Distance provider backed by `mash dist` against a prebuilt sketch.
///
/// Query FASTAs are one file per isolate under `query_dir`, written during
/// input parsing; [`query_path`](MashProvider::query_path) is the naming
/// contract shared with the FASTA extractor.
pub struct MashProvider {
    program: String,
    sketch: PathBuf,
    query_dir: PathBuf,
}

impl MashProvider {
    pub fn new(sketch: PathBuf, query_dir: PathBuf) -> Self {
        Self {
            program: MASH.to_string(),
            sketch,
            query_dir,
        }
    }

    /// Filesystem-safe path of one isolate's query FASTA.
    pub fn query_path(query_dir: &Path, isolate: &str) -> PathBuf {
        let safe: String = isolate
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        query_dir.join(format!("{safe}.fasta"))
    }

    fn parse_line(command: &str, line: &str) -> Result<DistanceHit> {
        let malformed = || PriorkinError::MalformedToolOutput {
            command: command.to_string(),
            line: line.to_string(),
        };

        // query <tab> reference <tab> distance <tab> p-value <tab> shared-hashes
        let mut fields = line.split('\t');
        let _query = fields.next().ok_or_else(malformed)?;
        let reference = fields.next().ok_or_else(malformed)?.to_string();
        let distance: f64 = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(malformed)?;
        let p_value: f64 = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(malformed)?;
        let shared_hashes = fields.next().ok_or_else(malformed)?.to_string();

        Ok(DistanceHit {
            reference,
            distance,
            p_value,
            shared_hashes,
        })
    }
}

impl DistanceProvider for MashProvider {
    fn distances(&self, isolate: &str) -> Result<Vec<DistanceHit>> {
        let query_fasta = Self::query_path(&self.query_dir, isolate);
        let command = format!(
            "{MASH} dist -i {} {}",
            query_fasta.display(),
            self.sketch.display()
        );

        // stderr goes to the void: draining two pipes from one thread can
        // deadlock once the tool fills the stderr buffer mid-stream.
        let mut child = Command::new(&self.program)
            .arg("dist")
            .arg("-i")
            .arg(&query_fasta)
            .arg(&self.sketch)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|_| PriorkinError::ToolMissing(self.program.clone()))?;

        let stdout = child.stdout.take().ok_or_else(|| PriorkinError::ToolFailed {
            command: command.clone(),
            detail: "could not capture stdout".to_string(),
        })?;

        let mut hits = Vec::new();
        let mut stream_err = None;
        for line in BufReader::new(stdout).lines() {
            let parsed = line
                .map_err(|e| PriorkinError::io(&query_fasta, e))
                .and_then(|line| {
                    if line.is_empty() {
                        Ok(None)
                    } else {
                        Self::parse_line(&command, &line).map(Some)
                    }
                });
            match parsed {
                Ok(Some(hit)) => hits.push(hit),
                Ok(None) => {}
                Err(err) => {
                    stream_err = Some(err);
                    break;
                }
            }
        }

        // The stdout pipe is closed by now, so the child is always reaped
        // before any error leaves this function.
        let status = child.wait().map_err(|e| PriorkinError::io(&query_fasta, e))?;
        if let Some(err) = stream_err {
            return Err(err);
        }
        if !status.success() {
            return Err(PriorkinError::ToolFailed {
                command,
                detail: format!("exited with {status}"),
            });
        }
        log::debug!("mash dist: {} hits for {isolate}", hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mash_dist_line() {
        let line = "query1\tref42\t0.0291323\t0\t412/1000";
        let hit = MashProvider::parse_line("mash dist", line).unwrap();
        assert_eq!(hit.reference, "ref42");
        assert!((hit.distance - 0.0291323).abs() < 1e-12);
        assert_eq!(hit.shared_hashes, "412/1000");
    }

    #[test]
    fn truncated_line_is_malformed_output() {
        let err = MashProvider::parse_line("mash dist", "a\tb\t0.1").unwrap_err();
        assert!(matches!(err, PriorkinError::MalformedToolOutput { .. }));
    }

    #[test]
    fn non_numeric_distance_is_malformed_output() {
        let err =
            MashProvider::parse_line("mash dist", "a\tb\tnotanumber\t0\t1/1000").unwrap_err();
        assert!(matches!(err, PriorkinError::MalformedToolOutput { .. }));
    }

    #[cfg(unix)]
    fn fake_tool(dir: &Path, body: &str) -> MashProvider {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake_mash");
        std::fs::write(&script, format!("#!/bin/sh\n{body}")).unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        MashProvider {
            program: script.to_string_lossy().into_owned(),
            sketch: dir.join("ref.msh"),
            query_dir: dir.to_path_buf(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn stderr_flood_does_not_stall_distances() {
        let dir = tempfile::tempdir().unwrap();
        // well past the pipe buffer size on any platform
        let provider = fake_tool(
            dir.path(),
            "head -c 262144 /dev/zero | tr '\\0' 'x' >&2\n\
             printf 'q\\tr1\\t0.01\\t0\\t5/1000\\n'\n\
             printf 'q\\tr2\\t0.02\\t0\\t4/1000\\n'\n",
        );

        let hits = provider.distances("q").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].reference, "r1");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_tool_failed() {
        let dir = tempfile::tempdir().unwrap();
        let provider = fake_tool(dir.path(), "exit 3\n");

        let err = provider.distances("q").unwrap_err();
        match err {
            PriorkinError::ToolFailed { detail, .. } => assert!(detail.contains("3")),
            other => panic!("unexpected: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn garbage_stdout_is_malformed_output_not_a_hang() {
        let dir = tempfile::tempdir().unwrap();
        let provider = fake_tool(dir.path(), "printf 'not\\ttab\\tseparated\\n'\n");

        assert!(matches!(
            provider.distances("q").unwrap_err(),
            PriorkinError::MalformedToolOutput { .. }
        ));
    }

    #[test]
    fn query_paths_are_filesystem_safe() {
        let path = MashProvider::query_path(Path::new("/tmp/run"), "hCoV-19/England/1/2020");
        assert_eq!(
            path,
            Path::new("/tmp/run/hCoV-19_England_1_2020.fasta")
        );
    }
}
