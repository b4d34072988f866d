use rand::Rng;

use super::catalog::{Catalog, Track};

/// Suggest a follow-up from the same genre as `current`, never `current`
/// itself.  None when the playlist has nothing else to offer.  Stateless:
/// recompute whenever the current track changes.
pub fn recommend(catalog: &Catalog, current: &Track) -> Option<Track> {
    recommend_with(catalog, current, &mut rand::thread_rng())
}

pub fn recommend_with<R: Rng + ?Sized>(
    catalog: &Catalog,
    current: &Track,
    rng: &mut R,
) -> Option<Track> {
    let candidates: Vec<&Track> = catalog
        .tracks(current.genre)
        .iter()
        .filter(|t| t.id != current.id)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let pick = rng.gen_range(0..candidates.len());
    Some(candidates[pick].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Genre;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog(n: usize) -> Catalog {
        let tracks = (0..n)
            .map(|i| Track {
                id: format!("t{}", i),
                name: format!("Track {}", i),
                file: format!("t{}.mp3", i),
                genre: Genre::Focus,
            })
            .collect();
        Catalog::from_tracks(tracks)
    }

    #[test]
    fn test_never_recommends_current() {
        let cat = catalog(5);
        let current = cat.tracks(Genre::Focus)[2].clone();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let pick = recommend_with(&cat, &current, &mut rng).expect("candidate");
            assert_ne!(pick.id, current.id);
            assert_eq!(pick.genre, Genre::Focus);
        }
    }

    #[test]
    fn test_none_for_singleton_playlist() {
        let cat = catalog(1);
        let current = cat.tracks(Genre::Focus)[0].clone();
        assert!(recommend(&cat, &current).is_none());
    }

    #[test]
    fn test_two_tracks_always_the_other() {
        let cat = catalog(2);
        let current = cat.tracks(Genre::Focus)[0].clone();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            let pick = recommend_with(&cat, &current, &mut rng).expect("candidate");
            assert_eq!(pick.id, "t1");
        }
    }
}
