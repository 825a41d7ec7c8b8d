//! Endpoint catalog: logical game pages and the paths they live at.

use std::collections::HashMap;

/// Logical operations the client knows how to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
  LobbyLogin,
  Overview,
  Rewards,
  Supplies,
  ResourceSettings,
  Facilities,
  TraderOverview,
  Research,
  Shipyard,
  Defenses,
  FleetDispatch,
  Movement,
  Galaxy,
  Alliance,
  Premium,
  Shop,
  FetchResources,
  FetchTechs,
  CharacterClassSelection,
}

impl Page {
  pub const ALL: [Page; 19] = [
    Page::LobbyLogin,
    Page::Overview,
    Page::Rewards,
    Page::Supplies,
    Page::ResourceSettings,
    Page::Facilities,
    Page::TraderOverview,
    Page::Research,
    Page::Shipyard,
    Page::Defenses,
    Page::FleetDispatch,
    Page::Movement,
    Page::Galaxy,
    Page::Alliance,
    Page::Premium,
    Page::Shop,
    Page::FetchResources,
    Page::FetchTechs,
    Page::CharacterClassSelection,
  ];
}

/// Immutable page -> path table, built once and shared by the client.
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
  paths: HashMap<Page, String>,
}

impl EndpointCatalog {
  /// The catalog of the live game.
  pub fn standard() -> Self {
    let paths = Page::ALL
      .iter()
      .map(|&page| (page, standard_path(page)))
      .collect();
    Self { paths }
  }

  /// Path (with query) for a page.
  pub fn path(&self, page: Page) -> &str {
    // standard() covers every variant
    self.paths.get(&page).map(String::as_str).unwrap_or("/game/index.php")
  }
}

fn standard_path(page: Page) -> String {
  match page {
    Page::LobbyLogin => "/game/lobbylogin.php".to_string(),
    Page::Overview => ingame("overview"),
    Page::Rewards => ingame("rewards"),
    Page::Supplies => ingame("supplies"),
    Page::ResourceSettings => ingame("resourceSettings"),
    Page::Facilities => ingame("facilities"),
    Page::TraderOverview => ingame("traderOverview"),
    Page::Research => ingame("research"),
    Page::Shipyard => ingame("shipyard"),
    Page::Defenses => ingame("defenses"),
    Page::FleetDispatch => ingame("fleetdispatch"),
    Page::Movement => ingame("movement"),
    Page::Galaxy => ingame("galaxy"),
    Page::Alliance => ingame("alliance"),
    Page::Premium => ingame("premium"),
    Page::Shop => ingame("shop"),
    Page::FetchResources => index_page("fetchResources", None),
    Page::FetchTechs => index_page("fetchTechs", None),
    Page::CharacterClassSelection => ingame("characterclassselection"),
  }
}

fn ingame(component: &str) -> String {
  index_page("ingame", Some(component))
}

fn index_page(page: &str, component: Option<&str>) -> String {
  match component {
    Some(c) => format!("/game/index.php?page={}&component={}", page, c),
    None => format!("/game/index.php?page={}", page),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_every_page_is_mapped() {
    let catalog = EndpointCatalog::standard();
    for page in Page::ALL {
      assert!(catalog.path(page).starts_with("/game/"), "{:?}", page);
    }
  }

  #[test]
  fn test_ingame_paths() {
    let catalog = EndpointCatalog::standard();
    assert_eq!(
      catalog.path(Page::Overview),
      "/game/index.php?page=ingame&component=overview"
    );
    assert_eq!(catalog.path(Page::FetchTechs), "/game/index.php?page=fetchTechs");
    assert_eq!(catalog.path(Page::LobbyLogin), "/game/lobbylogin.php");
  }
}
