// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote image (virtual media) management.
//!
//! The web protocol cannot attach images; that goes through the
//! controller's command-line interface, reached over a separate channel.
//! [`CommandRunner`] is the seam to that channel and [`VirtualMedia`]
//! implements the image operations on top of it.

use serde::Serialize;

use crate::error::Error;

/// Executes one command-line invocation on a controller.
///
/// Implementations own the connection (for example an SSH session to the
/// controller) and return the captured standard output. A non-zero exit
/// should be reported as [`Error::RemoteCommand`].
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Runs the command with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns error if the command could not be run or failed.
    async fn run(&self, args: &[&str]) -> Result<String, Error>;
}

/// Whether an image is attached and where it comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStatus {
    /// True when an image is attached.
    pub connected: bool,
    /// Location of the attached image, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Share type derived from the location, e.g. `nfs` or `http`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl MediaStatus {
    /// Parses `remoteimage -s` output.
    #[must_use]
    pub fn parse(output: &str) -> Self {
        let mut status = Self::default();
        for line in output.lines().map(str::trim) {
            if line.starts_with("Image is") {
                let lower = line.to_ascii_lowercase();
                status.connected = lower.contains("connected")
                    && !lower.contains("disconnected")
                    && !lower.contains("not connected");
            }
            if line.starts_with("Image Location") || line.starts_with("Share Name") {
                status.url = line
                    .split_once('=')
                    .map(|(_, value)| value.trim())
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
                    .or(status.url.take());
            }
        }
        status.media_type = status.url.as_deref().and_then(share_type);
        status
    }
}

fn share_type(url: &str) -> Option<String> {
    if let Some((scheme, _)) = url.split_once("://") {
        return Some(scheme.to_ascii_lowercase());
    }
    if url.starts_with("//") || url.starts_with("\\\\") {
        return Some("cifs".to_string());
    }
    // host:/export
    url.contains(":/").then(|| "nfs".to_string())
}

/// Virtual media operations for one controller.
#[derive(Debug)]
pub struct VirtualMedia<R> {
    runner: R,
}

impl<R: CommandRunner> VirtualMedia<R> {
    /// Creates the manager over a command runner.
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Reports the current attachment.
    ///
    /// # Errors
    ///
    /// Returns error if the status command fails.
    pub async fn status(&self) -> Result<MediaStatus, Error> {
        let output = self.runner.run(&["remoteimage", "-s"]).await?;
        let status = MediaStatus::parse(&output);
        tracing::debug!(connected = status.connected, url = ?status.url, "Virtual media status");
        Ok(status)
    }

    /// Attaches an image from an NFS, CIFS or HTTP location.
    ///
    /// Any attached image is detached first; a failure to detach is ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the attach command fails.
    pub async fn mount(&self, image_url: &str) -> Result<(), Error> {
        if let Err(err) = self.unmount().await {
            tracing::debug!(error = %err, "Nothing detached before mount");
        }
        self.runner
            .run(&["remoteimage", "-c", "-l", image_url])
            .await?;
        tracing::info!(url = image_url, "Virtual media attached");
        Ok(())
    }

    /// Detaches the current image.
    ///
    /// # Errors
    ///
    /// Returns error if the detach command fails.
    pub async fn unmount(&self) -> Result<(), Error> {
        self.runner.run(&["remoteimage", "-d"]).await?;
        tracing::info!("Virtual media detached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    /// Records invocations and fails commands whose first flag matches.
    struct RecordingRunner {
        output: String,
        failing_flag: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingRunner {
        fn new(output: &str) -> Self {
            Self {
                output: output.to_string(),
                failing_flag: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, flag: &'static str) -> Self {
            self.failing_flag = Some(flag);
            self
        }
    }

    impl CommandRunner for RecordingRunner {
        async fn run(&self, args: &[&str]) -> Result<String, Error> {
            let command = args.join(" ");
            self.calls.lock().push(command.clone());
            if self.failing_flag.is_some_and(|flag| args.get(1) == Some(&flag)) {
                return Err(Error::RemoteCommand {
                    command,
                    message: "exit status 1".to_string(),
                });
            }
            Ok(self.output.clone())
        }
    }

    #[test]
    fn parses_connected_status() {
        let status = MediaStatus::parse(
            "Remote File Share is Enabled\nImage is connected\nImage Location = 10.0.0.2:/isos/centos.iso\n",
        );
        assert!(status.connected);
        assert_eq!(status.url.as_deref(), Some("10.0.0.2:/isos/centos.iso"));
        assert_eq!(status.media_type.as_deref(), Some("nfs"));
    }

    #[test]
    fn disconnected_is_not_connected() {
        let status = MediaStatus::parse("Image is disconnected\n");
        assert!(!status.connected);
        assert_eq!(status.url, None);
        assert_eq!(status.media_type, None);
    }

    #[test]
    fn share_name_and_types() {
        let status = MediaStatus::parse("  Image is connected\n  Share Name = //fs/isos/win.iso\n");
        assert_eq!(status.media_type.as_deref(), Some("cifs"));
        assert_eq!(share_type("http://mirror/x.iso").as_deref(), Some("http"));
        assert_eq!(share_type("image.iso"), None);
    }

    #[test]
    fn serializes_type_field() {
        let status = MediaStatus {
            connected: true,
            url: Some("http://mirror/x.iso".to_string()),
            media_type: Some("http".to_string()),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["type"], "http");
        assert_eq!(json["connected"], true);
    }

    #[tokio::test]
    async fn status_runs_status_command() {
        let media = VirtualMedia::new(RecordingRunner::new("Image is connected"));
        assert!(media.status().await.unwrap().connected);
        assert_eq!(*media.runner.calls.lock(), vec!["remoteimage -s"]);
    }

    #[tokio::test]
    async fn mount_detaches_first() {
        let media = VirtualMedia::new(RecordingRunner::new(""));
        media.mount("http://mirror/x.iso").await.unwrap();
        assert_eq!(
            *media.runner.calls.lock(),
            vec!["remoteimage -d", "remoteimage -c -l http://mirror/x.iso"]
        );
    }

    #[tokio::test]
    async fn mount_ignores_detach_failure() {
        let media = VirtualMedia::new(RecordingRunner::new("").failing("-d"));
        media.mount("http://mirror/x.iso").await.unwrap();
        assert_eq!(media.runner.calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn mount_failure_is_reported() {
        let media = VirtualMedia::new(RecordingRunner::new("").failing("-c"));
        let err = media.mount("nfs://host/x.iso").await.unwrap_err();
        assert!(matches!(err, Error::RemoteCommand { .. }));
    }

    #[tokio::test]
    async fn unmount_failure_is_reported() {
        let media = VirtualMedia::new(RecordingRunner::new("").failing("-d"));
        assert!(media.unmount().await.is_err());
    }
}
