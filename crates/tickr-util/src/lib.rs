pub mod client_ext;
pub mod table;
pub mod ui;

#[cfg(any(test, feature = "canned"))]
pub use crate::client_ext::canned::Canned;
pub use crate::client_ext::fetch::{get_json, redacted, ClientFetchExt as Fetch};
pub use crate::table::{Cell, Projection, Table};

pub mod prelude {
    pub use crate::client_ext::fetch::ClientFetchExt as Fetch;
    #[allow(unused_imports)]
    pub use crate::client_ext::Client;

    pub fn build_client(user_agent: Option<&str>) -> anyhow::Result<Client> {
        let mut builder = reqwest::ClientBuilder::new();
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        Ok(builder.build()?)
    }
}
