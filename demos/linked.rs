use std::sync::Arc;

use dragon_bind::document::{DocumentOptions, LocalFileSystem};
use dragon_bind::{Bindable, Binder, Field, LinkedDocuments, ProviderRegistry};
use parking_lot::RwLock;

#[derive(Debug)]
struct Messages {
    prefix: String,
    chat: Chat,
}

#[derive(Debug)]
struct Chat {
    greeting: String,
    farewell: String,
    max_length: u32,
}

impl Bindable for Messages {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("prefix", &mut self.prefix),
            Field::section("chat", &mut self.chat),
        ]
    }
}

impl Bindable for Chat {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::value("greeting", &mut self.greeting),
            Field::value("farewell", &mut self.farewell),
            Field::value("max_length", &mut self.max_length).at("limits.max-length"),
        ]
    }
}

fn messages() -> Messages {
    Messages {
        prefix: "[Server]".into(),
        chat: Chat {
            greeting: "Hello!".into(),
            farewell: "Bye!".into(),
            max_length: 256,
        },
    }
}

fn main() -> Result<(), dragon_bind::Error> {
    let data_dir = std::env::temp_dir().join("dragon-bind-demo");
    let fs = Arc::new(LocalFileSystem::new().with_resource_dir("demos/lang"));

    let language = Arc::new(RwLock::new("en".to_string()));
    let selected = Arc::clone(&language);
    let documents =
        LinkedDocuments::new(move || selected.read().clone()).with_file_system(fs);

    for key in ["en", "tr"] {
        let options = DocumentOptions::builder(data_dir.join(format!("{key}.toml")))
            .with_default_resource(format!("{key}.toml"))
            .required(true)
            .build()?;
        documents.setup_key(key, options)?;
    }

    let binder = Binder::new(Arc::new(ProviderRegistry::with_builtins()));

    for key in ["en", "tr"] {
        *language.write() = key.to_string();
        let mut bound = messages();
        let report = documents.bind(&binder, &mut bound)?;
        println!(
            "{key}: {} {} ({} defaults written)",
            bound.prefix, bound.chat.greeting, report.defaults_written
        );
        println!("    farewell: {}", bound.chat.farewell);
    }

    Ok(())
}
