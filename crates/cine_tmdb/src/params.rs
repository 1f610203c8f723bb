use std::str::FromStr;

/// Which catalogue a listing request browses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Movies,
    Recommendations,
    Tv,
    Trending,
}

impl Listing {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::Recommendations => "recommendations",
            Self::Tv => "tv",
            Self::Trending => "trending",
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Movies | Self::Recommendations => "/discover/movie",
            Self::Tv => "/tv/popular",
            Self::Trending => "/trending/all/day",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown listing type: {0}")]
pub struct UnknownListing(pub String);

impl FromStr for Listing {
    type Err = UnknownListing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movies" => Ok(Self::Movies),
            "recommendations" => Ok(Self::Recommendations),
            "tv" => Ok(Self::Tv),
            "trending" => Ok(Self::Trending),
            _ => Err(UnknownListing(s.to_owned())),
        }
    }
}

/// Optional narrowing applied to every page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub genre: Option<String>,
    pub country: Option<String>,
    pub year: Option<u16>,
}

impl Filters {
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![];
        if let Some(genre) = &self.genre {
            query.push(("with_genres".to_owned(), genre.clone()));
        }
        if let Some(country) = &self.country {
            query.push(("with_origin_country".to_owned(), country.clone()));
        }
        if let Some(year) = self.year {
            query.push(("primary_release_year".to_owned(), year.to_string()));
        }

        query
    }
}
