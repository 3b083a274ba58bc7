//! Azure resource type names

pub const ROUTE_TABLE: &str = "azurerm_route_table";
pub const ROUTE: &str = "azurerm_route";
pub const VIRTUAL_NETWORK: &str = "azurerm_virtual_network";
pub const SUBNET: &str = "azurerm_subnet";
