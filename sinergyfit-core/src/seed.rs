//! Built-in routines and recipes available to every user.
//!
//! Seed records are compiled in, flagged preloaded, and never written to a
//! user's store. Their images point at bundled placeholders
//! (`placeholder://<key>`) that the front end resolves.

use crate::models::{Exercise, Recipe, Routine};

fn placeholder(key: &str) -> (String, String) {
    (format!("placeholder://{}", key), key.replace('-', " "))
}

fn exercise(
    id: &str,
    name: &str,
    sets: u32,
    reps: &str,
    description: &str,
    image_key: &str,
) -> Exercise {
    let (url, hint) = placeholder(image_key);
    Exercise::new(name, sets, reps)
        .with_id(id)
        .with_description(description)
        .with_image(url, hint)
}

/// Default routines, in display order.
pub fn preloaded_routines() -> Vec<Routine> {
    vec![
        Routine::new(
            "Full Body Blast",
            "A comprehensive workout targeting all major muscle groups for balanced strength and conditioning.",
        )
        .with_id("routine-1")
        .with_exercises(vec![
            exercise(
                "ex-1-1",
                "Squats",
                3,
                "10-12",
                "A fundamental compound exercise that strengthens your legs, glutes, and core.",
                "exercise-squat",
            ),
            exercise(
                "ex-1-2",
                "Push-ups",
                3,
                "As many as possible",
                "Builds upper body and core strength. Modify by doing them on your knees if needed.",
                "exercise-pushup",
            ),
            exercise(
                "ex-1-3",
                "Plank",
                3,
                "60 seconds",
                "An isometric core strength exercise that works the abs, back, and shoulders.",
                "exercise-plank",
            ),
        ])
        .preloaded(),
        Routine::new(
            "Upper Body Strength",
            "Focus on building strength and muscle definition in your chest, back, shoulders, and arms.",
        )
        .with_id("routine-2")
        .with_exercises(vec![
            exercise(
                "ex-2-1",
                "Bicep Curls",
                3,
                "10-12 per arm",
                "Isolate and build your bicep muscles with this classic dumbbell exercise.",
                "exercise-bicep-curl",
            ),
            exercise(
                "ex-2-2",
                "Push-ups",
                3,
                "10-15",
                "Excellent for chest, shoulders, and triceps. A bodyweight staple.",
                "exercise-pushup",
            ),
        ])
        .preloaded(),
        Routine::new(
            "Lower Body Power",
            "Develop powerful and toned legs and glutes with these targeted exercises.",
        )
        .with_id("routine-3")
        .with_exercises(vec![exercise(
            "ex-3-1",
            "Squats",
            4,
            "8-10",
            "The king of leg exercises, targeting quads, hamstrings, and glutes.",
            "exercise-squat",
        )])
        .preloaded(),
        Routine::new(
            "Cardio Burn",
            "Elevate your heart rate, improve endurance, and burn calories with this cardio session.",
        )
        .with_id("routine-4")
        .with_exercises(vec![exercise(
            "ex-4-1",
            "Running",
            1,
            "20-30 minutes",
            "A great way to improve cardiovascular health. Can be done on a treadmill or outdoors.",
            "exercise-running",
        )])
        .preloaded(),
    ]
}

fn recipe(id: &str, name: &str, ingredients: &[&str], instructions: &str, image_key: &str) -> Recipe {
    let (url, hint) = placeholder(image_key);
    Recipe::new(name)
        .with_id(id)
        .with_ingredients(ingredients.iter().map(|s| s.to_string()).collect())
        .with_instructions(instructions)
        .with_image(url, hint)
        .preloaded()
}

/// Default recipes, in display order.
pub fn preloaded_recipes() -> Vec<Recipe> {
    vec![
        recipe(
            "recipe-1",
            "Chicken Stir-fry",
            &[
                "1 lb chicken breast, sliced",
                "2 cups broccoli florets",
                "1 red bell pepper, sliced",
                "1 carrot, julienned",
                "1/4 cup soy sauce",
                "2 tbsp honey",
                "1 tbsp sesame oil",
                "2 cloves garlic, minced",
                "1 tsp ginger, grated",
                "Cooked rice, for serving",
            ],
            "1. In a small bowl, whisk together soy sauce, honey, sesame oil, garlic, and ginger.\n\
             2. Heat a large skillet or wok over medium-high heat. Add chicken and cook until browned and cooked through.\n\
             3. Add broccoli, bell pepper, and carrot to the skillet. Cook until tender-crisp.\n\
             4. Pour the sauce over the chicken and vegetables. Cook for 1-2 minutes until heated through.\n\
             5. Serve immediately over cooked rice.",
            "recipe-chicken-stir-fry",
        ),
        recipe(
            "recipe-2",
            "Hearty Lentil Soup",
            &[
                "1 tbsp olive oil",
                "1 large onion, chopped",
                "2 carrots, chopped",
                "2 celery stalks, chopped",
                "2 cloves garlic, minced",
                "1 cup brown or green lentils, rinsed",
                "8 cups vegetable broth",
                "1 (14.5 oz) can diced tomatoes",
                "1 tsp dried thyme",
                "Salt and pepper to taste",
            ],
            "1. Heat olive oil in a large pot or Dutch oven over medium heat.\n\
             2. Add onion, carrots, and celery and cook until softened, about 5-7 minutes. Add garlic and cook for another minute.\n\
             3. Stir in lentils, vegetable broth, diced tomatoes, and thyme.\n\
             4. Bring to a boil, then reduce heat and simmer for 45-60 minutes, or until lentils are tender.\n\
             5. Season with salt and pepper to taste before serving.",
            "recipe-lentil-soup",
        ),
        recipe(
            "recipe-3",
            "Quick Breakfast Smoothie",
            &[
                "1 ripe banana",
                "1/2 cup mixed berries (fresh or frozen)",
                "1/2 cup Greek yogurt",
                "1/2 cup milk (dairy or non-dairy)",
                "1 tbsp honey or maple syrup (optional)",
                "1 tbsp chia seeds or flax seeds",
            ],
            "1. Combine all ingredients in a blender.\n\
             2. Blend until smooth and creamy.\n\
             3. If the smoothie is too thick, add a little more milk. If it's too thin, add more fruit or yogurt.\n\
             4. Pour into a glass and enjoy immediately.",
            "recipe-breakfast-smoothie",
        ),
    ]
}

/// Looks up a seed routine by id.
pub fn find_routine(id: &str) -> Option<Routine> {
    preloaded_routines().into_iter().find(|r| r.id == id)
}

/// Looks up a seed recipe by id.
pub fn find_recipe(id: &str) -> Option<Recipe> {
    preloaded_recipes().into_iter().find(|r| r.id == id)
}
