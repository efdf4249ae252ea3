use crate::config::NmcliConfig;
use crate::traits::NetworkTool;
use crate::{AdapterError, AdapterErrorKind, FailureCause};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

// 通过调用 nmcli 命令行工具实现的适配器，适用于使用 NetworkManager 管理网络连接的 Linux 系统

#[derive(Debug, Clone)]
pub struct NmcliTool {
    config: NmcliConfig,
}

impl NmcliTool {
    pub fn new(config: NmcliConfig) -> Self {
        Self { config }
    }

    /// 组装完整的 argv（包含可选的 sudo 前缀）。
    /// 每个参数都是独立的 argv 元素，从不经过 shell 拼接。
    fn argv<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut argv = Vec::with_capacity(args.len() + 4);
        if self.config.use_sudo {
            argv.push(self.config.sudo_program.as_str());
        }
        argv.push(self.config.program.as_str());
        argv.extend_from_slice(args);
        argv
    }

    fn with_interface<'a>(&'a self, mut args: Vec<&'a str>) -> Vec<&'a str> {
        if let Some(iface) = self.config.interface.as_deref() {
            args.push("ifname");
            args.push(iface);
        }
        args
    }

    fn rescan_argv(&self) -> Vec<&str> {
        let args = self.with_interface(vec!["device", "wifi", "rescan"]);
        self.argv(&args)
    }

    fn list_argv(&self) -> Vec<&str> {
        let mut args = self.with_interface(vec![
            "--terse", "--fields", "SSID,SIGNAL", "device", "wifi", "list",
        ]);
        // 扫描时机由调用方决定，这里不再触发额外的扫描
        args.extend_from_slice(&["--rescan", "no"]);
        self.argv(&args)
    }

    fn connect_argv<'a>(&'a self, ssid: &'a str, password: &'a str) -> Vec<&'a str> {
        let args = self.with_interface(vec![
            "device", "wifi", "connect", ssid, "password", password,
        ]);
        self.argv(&args)
    }
}

#[async_trait]
impl NetworkTool for NmcliTool {
    async fn trigger_rescan(&self) -> Result<(), AdapterError> {
        tracing::debug!("Triggering nmcli rescan");
        run_tool(
            AdapterErrorKind::RescanFailed,
            &self.rescan_argv(),
            self.config.rescan_timeout(),
        )
        .await
        .map(|_| ())
    }

    async fn list_networks(&self) -> Result<String, AdapterError> {
        tracing::debug!("Listing networks via nmcli");
        run_tool(
            AdapterErrorKind::ListFailed,
            &self.list_argv(),
            self.config.list_timeout(),
        )
        .await
    }

    async fn join_network(&self, ssid: &str, password: &str) -> Result<(), AdapterError> {
        tracing::debug!(ssid = %ssid, "Joining network via nmcli");
        run_tool(
            AdapterErrorKind::ConnectFailed,
            &self.connect_argv(ssid, password),
            self.config.connect_timeout(),
        )
        .await
        .map(|_| ())
    }
}

/// 超时后先发 SIGTERM（sudo 会转发给 nmcli），等待这么久再强制 SIGKILL
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// 启动一个子进程并在 `limit` 内等待其结束，返回 stdout。
///
/// 子进程放在独立的进程组里。超时后整个进程组被终止，
/// 包括 sudo 派生出来的 nmcli 以及它们的后代进程。
pub(crate) async fn run_tool(
    kind: AdapterErrorKind,
    argv: &[&str],
    limit: Duration,
) -> Result<String, AdapterError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(AdapterError::new(
            kind,
            FailureCause::Spawn("empty command line".into()),
        ));
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd
        .spawn()
        .map_err(|e| AdapterError::new(kind, FailureCause::Spawn(e.to_string())))?;
    let pid = child.id();

    let wait = child.wait_with_output();
    tokio::pin!(wait);

    let output = tokio::select! {
        result = &mut wait => {
            result.map_err(|e| AdapterError::new(kind, FailureCause::Spawn(e.to_string())))?
        }
        _ = tokio::time::sleep(limit) => {
            tracing::warn!(program = %program, ?limit, "Command timed out, terminating process group");
            if let Some(pid) = pid {
                signal_group(pid, Signal::Terminate);
                let _ = tokio::time::timeout(TERMINATE_GRACE, &mut wait).await;
                signal_group(pid, Signal::Kill);
            }
            return Err(AdapterError::new(kind, FailureCause::TimedOut(limit)));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(AdapterError::new(
            kind,
            FailureCause::Exit {
                code: output.status.code(),
                stderr,
            },
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Terminate,
    Kill,
}

#[cfg(unix)]
fn signal_group(pgid: u32, signal: Signal) {
    let sig = match signal {
        Signal::Terminate => libc::SIGTERM,
        Signal::Kill => libc::SIGKILL,
    };
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // 进程组已经不存在时返回 ESRCH，忽略即可
    // SAFETY: killpg 只向给定进程组发送信号，不涉及内存
    let rc = unsafe { libc::killpg(pgid, sig) };
    if rc != 0 {
        tracing::trace!(pgid, ?signal, "killpg: {}", std::io::Error::last_os_error());
    }
}

// 非 unix 平台上只能依赖 kill_on_drop 终止直接子进程
#[cfg(not(unix))]
fn signal_group(_pgid: u32, _signal: Signal) {}
