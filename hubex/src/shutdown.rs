//! # **hubex** 关闭信号

use tokio::sync::watch;
use tracing::{error, info};

/// 关闭信号，每次消费过程仅创建一个
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    /// 构造函数
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// 获取只读令牌
    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            rx: self.tx.subscribe(),
        }
    }

    /// 触发关闭，仅首次触发返回 true
    pub fn trigger(&self) -> bool {
        let fired = self.tx.send_if_modified(|initiated| {
            if *initiated {
                false
            } else {
                *initiated = true;
                true
            }
        });
        if fired {
            info!("触发关闭信号");
        }
        fired
    }

    /// 是否已触发
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

/// 关闭信号只读令牌
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// 等待关闭信号，信号源被丢弃同样视为关闭
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|initiated| *initiated).await;
    }

    /// 是否已关闭
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

/// 等待 Ctrl-C 或 SIGTERM 信号
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(_) => info!("收到 Ctrl-C 信号"),
            Err(e) => {
                error!("监听 Ctrl-C 信号失败: {e}");
                info!("启用备用关闭机制");
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("收到 SIGTERM 信号");
            }
            Err(e) => {
                error!("监听 SIGTERM 信号失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
