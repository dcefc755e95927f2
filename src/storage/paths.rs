use std::path::PathBuf;

use super::Store;

impl Store {
    // Collection layout under the root:
    //   accounts.json     ordered sequence of Account records
    //   credentials.json  map of account id -> secret
    //   session.json      optional current-session marker
    pub(crate) fn accounts_file(&self) -> PathBuf {
        self.root_path().join("accounts.json")
    }

    pub(crate) fn credentials_file(&self) -> PathBuf {
        self.root_path().join("credentials.json")
    }

    pub(crate) fn session_file(&self) -> PathBuf {
        self.root_path().join("session.json")
    }
}
