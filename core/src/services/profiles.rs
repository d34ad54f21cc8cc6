use crate::client::Client;
use crate::params::{path_segment, QueryParams, ToQuery};
use crate::types::{Profile, ProfileListOptions, ProfileListResponse, ProfileTemplateListResponse};
use crate::Result;

/// Read-only access to certificate profiles.
#[derive(Debug, Clone, Copy)]
pub struct Profiles<'a> {
    client: &'a Client,
}

impl<'a> Profiles<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list(&self, options: &ProfileListOptions) -> Result<ProfileListResponse> {
        self.client.get("profiles", &options.to_query())
    }

    pub fn get(&self, id: &str) -> Result<Profile> {
        let path = format!("profiles/{}", path_segment(id)?);
        self.client.get(&path, &QueryParams::new())
    }

    /// Profiles open to public (unauthenticated) enrollment.
    pub fn list_public(&self) -> Result<ProfileListResponse> {
        self.client.get("profiles/public", &QueryParams::new())
    }

    pub fn list_templates(&self) -> Result<ProfileTemplateListResponse> {
        self.client.get("profiles/templates", &QueryParams::new())
    }
}
