use crate::client::Client;
use crate::params::{path_segment, QueryParams, ToQuery};
use crate::types::{
    BusinessUnit, BusinessUnitAdmin, BusinessUnitAdminRequest, BusinessUnitListOptions,
    BusinessUnitListResponse, BusinessUnitRequest, LicensedSeats,
};
use crate::Result;

/// Business units, their administrators and seat usage.
#[derive(Debug, Clone, Copy)]
pub struct BusinessUnits<'a> {
    client: &'a Client,
}

impl<'a> BusinessUnits<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn create(&self, request: &BusinessUnitRequest) -> Result<BusinessUnit> {
        self.client.post("business-unit", request)
    }

    pub fn get(&self, id: &str) -> Result<BusinessUnit> {
        self.client.get(&unit_path(id)?, &QueryParams::new())
    }

    pub fn update(&self, id: &str, request: &BusinessUnitRequest) -> Result<BusinessUnit> {
        self.client.put(&unit_path(id)?, request)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&unit_path(id)?)
    }

    pub fn list(&self, options: &BusinessUnitListOptions) -> Result<BusinessUnitListResponse> {
        self.client.get("business-unit", &options.to_query())
    }

    pub fn licensed_seats(&self, id: &str) -> Result<LicensedSeats> {
        let path = format!("{}/licensed-seats", unit_path(id)?);
        self.client.get(&path, &QueryParams::new())
    }

    pub fn add_admin(&self, id: &str, request: &BusinessUnitAdminRequest) -> Result<BusinessUnitAdmin> {
        let path = format!("{}/admin", unit_path(id)?);
        self.client.post(&path, request)
    }

    pub fn remove_admin(&self, id: &str, admin_id: &str) -> Result<()> {
        let path = format!("{}/admin/{}", unit_path(id)?, path_segment(admin_id)?);
        self.client.delete(&path)
    }

    pub fn list_admins(&self, id: &str) -> Result<Vec<BusinessUnitAdmin>> {
        let path = format!("{}/admin", unit_path(id)?);
        self.client.get(&path, &QueryParams::new())
    }
}

fn unit_path(id: &str) -> Result<String> {
    Ok(format!("business-unit/{}", path_segment(id)?))
}
