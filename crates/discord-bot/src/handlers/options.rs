use duebot_core::errors::{BotError, BotResult};
use serenity::model::application::interaction::application_command::CommandDataOption;

/// Read-only view over the options of a command or subcommand.
#[derive(Clone, Copy)]
pub struct Options<'a> {
    options: &'a [CommandDataOption],
}

impl<'a> Options<'a> {
    pub fn new(options: &'a [CommandDataOption]) -> Self {
        Self { options }
    }

    fn find(&self, name: &str) -> Option<&'a CommandDataOption> {
        self.options.iter().find(|opt| opt.name == name)
    }

    /// The chosen subcommand and its own options.
    pub fn subcommand(&self) -> BotResult<(&'a str, Options<'a>)> {
        self.options
            .first()
            .map(|opt| (opt.name.as_str(), Options::new(&opt.options)))
            .ok_or_else(|| BotError::Validation("Missing subcommand.".to_string()))
    }

    pub fn string(&self, name: &str) -> Option<&'a str> {
        self.find(name)?.value.as_ref()?.as_str()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.find(name)?.value.as_ref()?.as_i64()
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.find(name)?.value.as_ref()?.as_bool()
    }

    pub fn require_string(&self, name: &str) -> BotResult<&'a str> {
        self.string(name)
            .ok_or_else(|| BotError::Validation(format!("Missing {name} parameter.")))
    }

    pub fn require_integer(&self, name: &str) -> BotResult<i64> {
        self.integer(name)
            .ok_or_else(|| BotError::Validation(format!("Missing {name} parameter.")))
    }
}
