use clap::{Args, Subcommand};

use super::{confirm, origin, truncate, OutputFormat};
use sinergyfit_core::{Account, Recipe};

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// List preloaded and custom recipes
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show your own recipes
        #[arg(long)]
        mine: bool,
    },

    /// Show a recipe's details
    Show {
        /// Recipe ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new recipe
    Create {
        /// Name of the recipe
        name: String,

        /// Ingredient line; multi-line values are split (can be repeated)
        #[arg(long = "ingredient", short = 'i', value_name = "INGREDIENT")]
        ingredients: Vec<String>,

        /// Cooking instructions
        #[arg(long)]
        instructions: String,

        /// Image URL
        #[arg(long)]
        image_url: Option<String>,

        /// Short description of the image
        #[arg(long)]
        image_hint: Option<String>,
    },

    /// Update one of your recipes
    Update {
        /// Recipe ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// Replace the ingredients (can be repeated)
        #[arg(long = "ingredient", short = 'i', value_name = "INGREDIENT")]
        ingredients: Vec<String>,

        /// New instructions
        #[arg(long)]
        instructions: Option<String>,

        /// Image URL
        #[arg(long)]
        image_url: Option<String>,

        /// Short description of the image
        #[arg(long)]
        image_hint: Option<String>,
    },

    /// Delete one of your recipes
    Delete {
        /// Recipe ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Make an editable copy of a recipe that replaces it in listings
    Customize {
        /// Recipe ID
        id: String,
    },
}

fn ingredient_lines(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| Recipe::parse_ingredients(value))
        .collect()
}

impl RecipeCommand {
    pub async fn run(&self, account: &Account) -> Result<(), Box<dyn std::error::Error>> {
        let library = account.library();

        match &self.command {
            RecipeSubcommand::List { format, mine } => {
                let recipes = if *mine {
                    library.recipe_store().list().await?
                } else {
                    library.recipes().await?
                };

                if recipes.is_empty() {
                    println!("No recipes found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipes)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<28}  {:<30}  {:>11}  SOURCE", "ID", "NAME", "INGREDIENTS");
                        println!("{}", "-".repeat(90));
                        for recipe in &recipes {
                            println!(
                                "{:<28}  {:<30}  {:>11}  {}",
                                recipe.id,
                                truncate(&recipe.name, 30),
                                recipe.ingredients.len(),
                                origin(recipe.is_preloaded, recipe.source_seed_id.as_deref())
                            );
                        }
                        println!("\nTotal: {} recipe(s)", recipes.len());
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Show { id, format } => {
                let recipe = library
                    .find_recipe(id)
                    .await?
                    .ok_or_else(|| format!("Recipe not found: {}", id))?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipe)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", recipe);
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Create {
                name,
                ingredients,
                instructions,
                image_url,
                image_hint,
            } => {
                let recipe = Recipe::new(name.trim())
                    .with_ingredients(ingredient_lines(ingredients))
                    .with_instructions(instructions.trim())
                    .with_image(
                        image_url.clone().unwrap_or_default(),
                        image_hint.clone().unwrap_or_default(),
                    );

                library.recipe_store().add(recipe.clone())?.wait().await?;
                println!("Created recipe:");
                println!("{}", recipe);
                Ok(())
            }

            RecipeSubcommand::Update {
                id,
                name,
                ingredients,
                instructions,
                image_url,
                image_hint,
            } => {
                let has_updates = name.is_some()
                    || !ingredients.is_empty()
                    || instructions.is_some()
                    || image_url.is_some()
                    || image_hint.is_some();

                if !has_updates {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let mut recipe = library
                    .find_recipe(id)
                    .await?
                    .ok_or_else(|| format!("Recipe not found: {}", id))?;

                if recipe.is_preloaded {
                    return Err(format!(
                        "'{}' is preloaded. Run 'sinergy recipe customize {}' to get an editable copy.",
                        id, id
                    )
                    .into());
                }

                if let Some(new_name) = name {
                    recipe.name = new_name.trim().to_string();
                }
                if !ingredients.is_empty() {
                    recipe.ingredients = ingredient_lines(ingredients);
                }
                if let Some(new_instructions) = instructions {
                    recipe.instructions = new_instructions.trim().to_string();
                }
                if let Some(url) = image_url {
                    recipe.image = url.clone();
                }
                if let Some(hint) = image_hint {
                    recipe.image_hint = hint.clone();
                }

                library.recipe_store().update(&recipe)?.wait().await?;
                println!("Updated recipe:");
                println!("{}", recipe);
                Ok(())
            }

            RecipeSubcommand::Delete { id, force } => {
                let recipe = library
                    .recipe_store()
                    .get(id)
                    .await?
                    .ok_or_else(|| format!("Recipe not found among your recipes: {}", id))?;

                if !force && !confirm(&format!("Delete recipe '{}'?", recipe.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                library.recipe_store().delete(&recipe.id).wait().await?;
                println!("Deleted recipe: {}", recipe.name);
                println!("Meal plan entries keep their own copy of this recipe.");
                Ok(())
            }

            RecipeSubcommand::Customize { id } => {
                let recipe = library
                    .find_recipe(id)
                    .await?
                    .ok_or_else(|| format!("Recipe not found: {}", id))?;

                let (copy, handle) = library.customize_recipe(&recipe)?;
                handle.wait().await?;
                println!("Created editable copy of '{}':", recipe.name);
                println!("{}", copy);
                Ok(())
            }
        }
    }
}
