//! A small music catalogue queried through request parameters.
//!
//! Run with `cargo run --example music_catalog`. Set `RUST_LOG=debug` to watch the collection
//! backend apply each stage.

use resource_query::collection;
use resource_query::prelude::*;

fn registry() -> Registry {
    RegistryBuilder::new()
        .register(
            ResourceType::new("artists")
                .put_field(Attribute::new("id", DataType::Integer).queryable())
                .put_field(Attribute::new("name", DataType::String).queryable())
                .put_field(Relationship::to_many("albums", "albums")),
        )
        .register(
            ResourceType::new("albums")
                .put_field(Attribute::new("id", DataType::Integer).queryable())
                .put_field(Attribute::new("title", DataType::String).queryable())
                .put_field(
                    Attribute::new("releaseDate", DataType::Date)
                        .mapped_to("release_date")
                        .queryable(),
                )
                .put_field(Attribute::new("tracks", DataType::Integer).queryable())
                .put_field(Relationship::to_one("artist", "artists")),
        )
        .build()
}

fn album(id: i64, title: &str, tracks: i64, artist: &str, released: &str) -> Record {
    let release_date = DataType::Date.cast(&Value::from(released)).unwrap();
    let artist: Record = [("name".to_owned(), Value::from(artist))].into();
    [
        ("id".to_owned(), Value::Integer(id)),
        ("title".to_owned(), Value::from(title)),
        ("tracks".to_owned(), Value::Integer(tracks)),
        ("release_date".to_owned(), release_date),
        ("artist".to_owned(), Value::Map(artist)),
    ]
    .into()
}

fn main() {
    resource_query::init_logging();

    let registry = registry();
    let albums = registry.expect_type("albums");

    let catalogue = Records::from(vec![
        album(1, "The Kick Inside", 13, "Kate Bush", "1978-02-17"),
        album(2, "Remain in Light", 8, "Talking Heads", "1980-10-08"),
        album(3, "Duran Duran", 9, "Duran Duran", "1981-06-15"),
        album(4, "Rio", 9, "Duran Duran", "1982-05-10"),
        album(5, "Seven and the Ragged Tiger", 9, "Duran Duran", "1983-11-21"),
        album(6, "Hounds of Love", 12, "Kate Bush", "1985-09-16"),
        album(7, "Notorious", 10, "Duran Duran", "1986-11-18"),
    ]);

    // The kind of parameter set a web layer would hand over.
    let params = Params::new()
        .filter("artist.name", "Duran Duran")
        .filter("releaseDate gte", "1982-01-01")
        .sort("-releaseDate")
        .page("number", "1")
        .page("size", "2");

    let config = Config {
        max_page_size: Some(50),
    };
    let options = match params::validate(albums, &params, &config) {
        Ok(options) => options,
        Err(errors) => {
            for error in errors {
                eprintln!("invalid request: {error}");
            }
            std::process::exit(1);
        }
    };

    let query = options.to_query();
    let filtered = collection::query(catalogue.clone(), &query);
    let info = collection::page_info(&filtered, &query);
    println!(
        "page {}/{} ({} matching albums)",
        info.number, info.total, info.resources
    );

    for record in collection::all(catalogue, &query) {
        let values = albums
            .map_values(&record, ["title", "releaseDate", "artist.name"])
            .unwrap();
        let line = values
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!("{name}={value}"),
                None => format!("{name}=∅"),
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("{line}");
    }

    // The same query, rendered for an external database instead.
    let statement = collection::all(SelectQuery::for_type(albums), &query);
    println!("SQL: {statement} -- params {:?}", statement.params);
}
