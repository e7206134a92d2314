use att_state::FileLedger;
use tracing::info;

use crate::profile::ConnectionProfile;

/// Open handle to a ledger, released on [`Connection::close`] or drop.
pub struct Connection {
    ledger: FileLedger,
    profile: ConnectionProfile,
    open: bool,
}

impl Connection {
    pub fn open(profile: &ConnectionProfile) -> anyhow::Result<Self> {
        let ledger = FileLedger::open(&profile.ledger_path)?;
        info!(
            identity = %profile.identity,
            channel = %profile.channel,
            ledger = %profile.ledger_path.display(),
            "connected"
        );
        Ok(Self {
            ledger,
            profile: profile.clone(),
            open: true,
        })
    }

    pub fn ledger(&self) -> &FileLedger {
        &self.ledger
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            info!(identity = %self.profile.identity, "disconnected");
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.release();
    }
}
